use audiomatch_core::{TranscodeError, WavAudio};
use std::fs::File;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Case-insensitive check for the canonical `.wav` extension.
pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Sibling path with the same stem and a `.wav` extension.
pub fn wav_sibling(path: &Path) -> PathBuf {
    path.with_extension("wav")
}

/// Decode an arbitrary audio container and write a mono 16-bit WAV sibling.
/// Returns the sibling path. The caller owns the produced file.
pub fn transcode_to_wav(input: &Path) -> Result<PathBuf, TranscodeError> {
    let audio = decode_to_pcm(input)?;
    let output = wav_sibling(input);
    write_wav(&output, &audio)?;
    tracing::debug!(
        "transcoded {} → {} ({:.1}s at {}Hz)",
        input.display(),
        output.display(),
        audio.duration_secs(),
        audio.sample_rate,
    );
    Ok(output)
}

/// Decode any supported container/codec to mono interleaved i16 PCM.
fn decode_to_pcm(input: &Path) -> Result<WavAudio, TranscodeError> {
    let file = File::open(input)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = input.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| TranscodeError::Probe(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(TranscodeError::NoAudioTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| TranscodeError::Decode("source has no sample rate".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TranscodeError::Decode(e.to_string()))?;

    let mut samples: Vec<i16> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<i16>> = None;
    let mut channels: u16 = 1;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(TranscodeError::Decode(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    channels = spec.channels.count().max(1) as u16;
                    sample_buf = Some(SampleBuffer::<i16>::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // A corrupt packet is recoverable; skip it and keep decoding.
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::trace!("skipping undecodable packet: {e}");
            }
            Err(e) => return Err(TranscodeError::Decode(e.to_string())),
        }
    }

    if samples.is_empty() {
        return Err(TranscodeError::NoAudioTrack);
    }

    Ok(WavAudio {
        samples: downmix_to_mono(&samples, channels),
        sample_rate,
    })
}

/// Read a WAV file into mono i16 PCM.
pub fn read_wav(path: &Path) -> Result<WavAudio, TranscodeError> {
    let reader = hound::WavReader::open(path).map_err(|e| TranscodeError::WavRead(e.to_string()))?;
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(|e| TranscodeError::WavRead(e.to_string()))?,
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TranscodeError::WavRead(e.to_string()))?
            .into_iter()
            .map(|f| (f.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect(),
    };

    Ok(WavAudio {
        samples: downmix_to_mono(&samples, spec.channels),
        sample_rate: spec.sample_rate,
    })
}

/// Write mono i16 PCM as a 16-bit WAV file.
pub fn write_wav(path: &Path, audio: &WavAudio) -> Result<(), TranscodeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).map_err(|e| TranscodeError::WavWrite(e.to_string()))?;
    for sample in &audio.samples {
        writer
            .write_sample(*sample)
            .map_err(|e| TranscodeError::WavWrite(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| TranscodeError::WavWrite(e.to_string()))?;
    Ok(())
}

fn downmix_to_mono(samples: &[i16], channels: u16) -> Vec<i16> {
    if channels <= 1 {
        return samples.to_vec();
    }
    samples
        .chunks(channels as usize)
        .map(|chunk| {
            let sum: i32 = chunk.iter().map(|&s| s as i32).sum();
            (sum / chunk.len() as i32) as i16
        })
        .collect()
}

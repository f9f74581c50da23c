pub mod transcode;

pub use transcode::{is_wav, read_wav, transcode_to_wav, wav_sibling, write_wav};

pub mod amplitude;
pub mod pcm_buffer;
pub mod ring_buffer;
pub mod wav_format;

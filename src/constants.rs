// Define some constants for the stream parameters
pub const BITS_PER_SAMPLE: u16 = 16; // only 16-bit signed PCM is supported
pub const BYTES_PER_SAMPLE: usize = 2;
pub const SAMPLE_SCALE: f32 = 32768.0; // i16 <-> normalized f32

pub const DEFAULT_BLOCK_FRAMES: usize = 1024;
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

pub const CONFIG_FILE: &str = "Config.toml";

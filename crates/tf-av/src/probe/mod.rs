//! Probe backends that shell out to external tools.
//!
//! [`FfprobeProber`] implements [`tf_probe::Prober`] and can be layered with
//! the chapters pseudo-prober through [`tf_probe::CompositeProber`];
//! [`MediaInfoProbe`] supplies the richer per-track details used for
//! codec-variant refinement.

pub mod ffprobe;
pub mod mediainfo;

pub use self::ffprobe::FfprobeProber;
pub use self::mediainfo::MediaInfoProbe;

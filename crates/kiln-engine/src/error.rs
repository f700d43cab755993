use thiserror::Error;

/// Errors surfaced by the execution layer.
///
/// Construction-time failures (device negotiation, layout validation,
/// usage checks) are returned immediately and loudly; no partially built
/// object is ever handed back. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// No adapter exists, or adapter/device negotiation was refused.
    ///
    /// Terminal for the whole pipeline; there is no fallback path.
    #[error("no usable GPU device: {reason}")]
    DeviceUnavailable { reason: String },

    /// The presentation surface reports no supported formats at all.
    ///
    /// Unlike a merely missing *preferred* format (which falls back to the
    /// first supported one), an empty capability set is reported to the
    /// caller instead of being assumed away.
    #[error("surface reports no supported pixel formats")]
    SurfaceFormatUnavailable,

    /// A binding set does not match the pipeline's declared layout.
    ///
    /// Wrong slot index, wrong resource kind, or wrong entry count. Never
    /// coerced to a nearby slot; caught at binding-set construction.
    #[error("binding layout mismatch at slot {slot}: expected {expected}, found {found}")]
    PipelineLayoutMismatch {
        slot: u32,
        expected: String,
        found: String,
    },

    /// An operation was requested on a resource lacking the usage flag
    /// it requires. Caught before any GPU work is recorded.
    #[error("resource `{label}` lacks usage {needed} (created with {usage})")]
    ResourceUsageViolation {
        label: String,
        needed: String,
        usage: String,
    },

    /// A host readback map request resolved with an error.
    #[error("buffer map failed: {reason}")]
    MapFailure { reason: String },

    /// Host pixel data does not match the declared texture dimensions.
    #[error("texture `{label}`: expected {expected} bytes ({width}x{height} rgba8), got {got}")]
    PixelDataMismatch {
        label: String,
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

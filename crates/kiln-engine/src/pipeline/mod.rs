//! Compiled pipeline configurations.
//!
//! Two variants, compute and render, each binding shader entry points
//! plus an explicitly declared binding layout. Layouts are never inferred
//! from shader reflection; they are stated once at construction and every
//! binding set is validated against them structurally.

mod compute;
mod layout;
mod render;

pub use compute::ComputePipeline;
pub use layout::{BindingKind, BindingLayout, BindingSlot};
pub use render::{RenderPipeline, RenderPipelineDesc, VertexLayout};

/// Implemented by pipeline variants that declare a binding contract.
///
/// Binding sets are constructed against this contract; see
/// [`BindingSet`](crate::binding::BindingSet).
pub trait BindingContract {
    /// The declared slot contract.
    fn binding_layout(&self) -> &BindingLayout;

    /// The wgpu realization of the contract.
    fn bind_group_layout(&self) -> &wgpu::BindGroupLayout;

    /// Diagnostic label of the declaring pipeline.
    fn label(&self) -> &str;
}

/// File-backed model tracking and registry.
///
/// Mirrors the layout the training pipeline writes: experiments and runs
/// under the tracking root (each with a `meta.yaml`, per-key `params/` and
/// `metrics/` files, and an `artifacts/` tree), plus registered model
/// versions under `models/<name>/version-<n>/`.
pub mod resolve;
pub mod store;

pub use resolve::{resolve_model, LocalScanResolver, ModelResolver, RegistryResolver, ResolvedModel};
pub use store::{ExperimentMeta, ModelVersionMeta, RegistryStore, RunMeta};

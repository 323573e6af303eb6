//! Release cutting: validation, versioning, changelog, publish
//!
//! # Core Invariants
//!
//! 1. **Reversible before irreversible**
//!    - Precondition gates mutate nothing and abort freely
//!    - Remote pushes run from easiest to reverse to hardest
//!    - The plain version tag is the publish point; nothing is undone
//!      after it lands
//!
//! 2. **One undo per mutating step**
//!    - Every mutating step registers its undo before it runs
//!    - Undo actions run in reverse registration order on failure
//!    - Effects that cannot be auto-reverted surface manual instructions
//!
//! 3. **The changelog drives the version**
//!    - A pending `# TBD` section must exist, be unique, and have content
//!    - A breaking-change subheader upgrades the bump from patch to minor
//!    - `--bump-major` overrides the changelog-driven inference
//!
//! # Components
//!
//! - **changelog**: pending-section scanner and release-section rewriter
//! - **version**: tag-derived version resolution and bump policy
//! - **scripts**: pre-release script manifest
//! - **freshness**: fetch staleness gate (sidecar timestamp)
//! - **orchestrator**: the release state machine

pub mod changelog;
pub mod freshness;
pub mod orchestrator;
pub mod scripts;
pub mod version;

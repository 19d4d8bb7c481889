//! GPU-free animation core of the holiday scene.
//!
//! Everything in here is plain math over `cgmath` vectors so it can be driven
//! by the render loop and exercised by tests alike:
//!
//! - `arrangement` is the tree/scattered state machine with its auto-play schedule
//! - `layout` precomputes the paired scattered/tree targets of every instance
//! - `blend` smooths each instance toward the current arrangement every frame
//! - `overlay` adds floating, bobbing and pulsing on top of the blended pose
//! - `snow` is the looping ambient particle field

pub mod arrangement;
pub mod blend;
pub mod layout;
pub mod overlay;
pub mod snow;

pub use arrangement::{Arrangement, ArrangementMachine, ArrangementTimings, PendingTimers};
pub use blend::{BlendState, GroupAnimator};
pub use layout::{ConeProfile, InstanceLayout, LayoutParams, LayoutSpec, Placement, generate_layout};
pub use snow::{SnowField, SnowParams};

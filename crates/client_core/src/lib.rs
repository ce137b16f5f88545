//! Client side of the list views: local list state, the optimistic
//! mutation controller and the stores it writes through.

pub mod controller;
pub mod error;
pub mod list_state;
pub mod remote;
pub mod view;

pub use controller::{OptimisticController, PendingMutation};
pub use error::{MutationError, MutationKind};
pub use list_state::ListState;
pub use remote::{HttpRemoteStore, RemoteStatusError, RemoteStore, TitlePatch};
pub use view::ResourceView;

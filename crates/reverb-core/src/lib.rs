//! # mozue-reverb-core
//!
//! Session routing, stream reassembly, and broadcast fan-out for the Reverb
//! media relay.
//!
//! The crate is transport-agnostic: it consumes [`SessionEvent`] values and
//! queues outbound payloads on [`StreamSink`] handles, leaving all I/O to
//! the adapter feeding it. The building blocks:
//!
//! - **Reassembler** - accumulates stream chunks into complete payloads
//! - **Hub / Channel** - subscriber registries with fan-out broadcast
//! - **route / Role** - validates handshakes and picks the handler variant
//! - **Handler** - chat, publisher, and viewer session behaviors
//! - **Session** - owns the single handler and dispatches events
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ SessionEvent  ┌─────────┐ dispatch ┌─────────┐
//! │ transport │──────────────▶│ Session │─────────▶│ Handler │
//! └───────────┘               └─────────┘          └────┬────┘
//!       ▲                                               │ broadcast
//!       │ one fresh uni stream per queued payload  ┌────▼────┐
//!       └──────────────────────────────────────────│   Hub   │
//!                                                  └─────────┘
//! ```

pub mod events;
pub mod handler;
pub mod hub;
pub mod ids;
pub mod reassembly;
pub mod route;
pub mod session;
pub mod sink;

pub use events::SessionEvent;
pub use handler::Handler;
pub use hub::{Channel, ChatMember, Hub, HubStats, MediaKind};
pub use ids::{ConnectionId, StreamId};
pub use reassembly::Reassembler;
pub use route::{route, Role, RouteDecision};
pub use session::{Session, SessionError};
pub use sink::{SinkReceiver, StreamSink};

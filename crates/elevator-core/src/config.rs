//! Fixed network configuration (spec §6: "Fixed port 3000, fixed loopback
//! IP. No environment variables.") Centralized here, the way the teacher
//! centralizes defaults in its own `config.rs`, even though none of it is
//! actually configurable.

/// Address the controller binds to.
pub const CONTROLLER_BIND_ADDR: &str = "0.0.0.0:3000";

/// Address cars and call-pads connect to.
pub const CONTROLLER_CONNECT_ADDR: &str = "127.0.0.1:3000";

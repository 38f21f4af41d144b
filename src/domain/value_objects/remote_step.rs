//! Remote steps run after a successful sync, in this order.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteStep {
    Checkout,
    Build,
    Deploy,
}

impl RemoteStep {
    /// Execution order
    pub const ALL: [RemoteStep; 3] = [RemoteStep::Checkout, RemoteStep::Build, RemoteStep::Deploy];

    pub fn as_str(self) -> &'static str {
        match self {
            RemoteStep::Checkout => "checkout",
            RemoteStep::Build => "build",
            RemoteStep::Deploy => "deploy",
        }
    }
}

impl fmt::Display for RemoteStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

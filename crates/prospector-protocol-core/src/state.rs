/// The state of a Minecraft protocol connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Handshaking,
    Status,
    Login,
}

impl ConnectionState {
    pub fn from_handshake_next(next: i32) -> Option<Self> {
        match next {
            1 => Some(ConnectionState::Status),
            2 => Some(ConnectionState::Login),
            _ => None,
        }
    }

    /// The value a handshake sends to enter this state.
    pub fn handshake_next(self) -> Option<i32> {
        match self {
            ConnectionState::Status => Some(1),
            ConnectionState::Login => Some(2),
            ConnectionState::Handshaking => None,
        }
    }
}

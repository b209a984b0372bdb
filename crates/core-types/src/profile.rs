use serde::{Deserialize, Serialize};

/// Line settings applied to a transport before it is ever opened.
///
/// The connector core never inspects these; they are handed through to the
/// concrete binding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeviceProfile {
    pub baud_rate: u32,
    pub data_bits: u8,
    pub stop_bits: u8,
    pub parity: ParityMode,
    pub flow_control: FlowControl,
    /// Blocking read timeout of the opened conduit
    pub read_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParityMode {
    None,
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlowControl {
    None,
    Hardware,
    Software,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::new_8n1(115200)
    }
}

impl DeviceProfile {
    /// Create a standard 8N1 profile at specified baud rate
    pub fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: 8,
            stop_bits: 1,
            parity: ParityMode::None,
            flow_control: FlowControl::None,
            read_timeout_ms: 100,
        }
    }

    /// Parse framing string like "8N1" (8 data bits, No parity, 1 stop bit)
    pub fn from_framing(framing: &str, baud_rate: u32) -> Result<Self, String> {
        if framing.len() != 3 {
            return Err(format!(
                "Invalid framing format '{}': must be 3 characters (e.g., '8N1')",
                framing
            ));
        }

        let chars: Vec<char> = framing.chars().collect();

        let data_bits = match chars.first() {
            Some(c @ '5'..='8') => *c as u8 - b'0',
            Some(c) => return Err(format!("Invalid data bits '{}': must be 5 to 8", c)),
            None => return Err("Internal error: framing string unexpectedly empty".into()),
        };

        let parity = match chars.get(1).map(|c| c.to_ascii_uppercase()) {
            Some('N') => ParityMode::None,
            Some('E') => ParityMode::Even,
            Some('O') => ParityMode::Odd,
            Some(c) => return Err(format!("Invalid parity '{}': must be N, E, or O", c)),
            None => return Err("Internal error: missing parity character".into()),
        };

        let stop_bits = match chars.get(2) {
            Some('1') => 1,
            Some('2') => 2,
            Some(c) => return Err(format!("Invalid stop bits '{}': must be 1 or 2", c)),
            None => return Err("Internal error: missing stop bits character".into()),
        };

        Ok(Self {
            baud_rate,
            data_bits,
            stop_bits,
            parity,
            ..Self::new_8n1(baud_rate)
        })
    }

    pub fn with_flow_control(mut self, flow_control: FlowControl) -> Self {
        self.flow_control = flow_control;
        self
    }

    /// Framing in the conventional "8N1" notation
    pub fn framing(&self) -> String {
        let parity = match self.parity {
            ParityMode::None => 'N',
            ParityMode::Even => 'E',
            ParityMode::Odd => 'O',
        };
        format!("{}{}{}", self.data_bits, parity, self.stop_bits)
    }
}

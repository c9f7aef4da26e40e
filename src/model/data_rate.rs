use crate::core::constants::{DEFAULT_BANDWIDTH, MAX_SPREADING_FACTOR, MIN_SPREADING_FACTOR};
use crate::util::error::MapperError;
use std::fmt;
use std::str::FromStr;

/// A LoRa data rate, written `SF<spreading factor>BW<bandwidth>`.
///
/// Ordering compares the spreading factor first, so the minimum of a set of
/// data rates is the fastest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataRate {
    pub(crate) spreading_factor: u8,
    pub(crate) bandwidth: u16,
}

impl DataRate {
    /// Data rate at the default 125 kHz bandwidth.
    ///
    /// # Example
    /// ```
    /// use lora_mapper::DataRate;
    ///
    /// let rate = DataRate::new(9)?;
    /// assert_eq!(rate.to_string(), "SF9BW125");
    /// # Ok::<(), lora_mapper::MapperError>(())
    /// ```
    pub fn new(spreading_factor: u8) -> Result<Self, MapperError> {
        Self::with_bandwidth(spreading_factor, DEFAULT_BANDWIDTH)
    }

    pub fn with_bandwidth(spreading_factor: u8, bandwidth: u16) -> Result<Self, MapperError> {
        if !(MIN_SPREADING_FACTOR..=MAX_SPREADING_FACTOR).contains(&spreading_factor) {
            return Err(MapperError::InvalidDataRate(format!(
                "spreading factor {spreading_factor} outside {MIN_SPREADING_FACTOR}..={MAX_SPREADING_FACTOR}"
            )));
        }
        if bandwidth == 0 {
            return Err(MapperError::InvalidDataRate("bandwidth must be positive".into()));
        }
        Ok(Self {
            spreading_factor,
            bandwidth,
        })
    }

    /// SF12 at 125 kHz, the rate that reaches furthest.
    pub fn slowest() -> Self {
        Self {
            spreading_factor: MAX_SPREADING_FACTOR,
            bandwidth: DEFAULT_BANDWIDTH,
        }
    }

    pub fn spreading_factor(&self) -> u8 {
        self.spreading_factor
    }

    pub fn bandwidth(&self) -> u16 {
        self.bandwidth
    }

    /// Expands a Sodaq logger bitmask into data rates, fastest first.
    ///
    /// Bit 0 stands for SF7 up to bit 5 for SF12; higher bits are ignored.
    pub fn from_mask(mask: u8) -> Vec<DataRate> {
        (MIN_SPREADING_FACTOR..=MAX_SPREADING_FACTOR)
            .filter(|sf| mask & (1 << (sf - MIN_SPREADING_FACTOR)) != 0)
            .map(|spreading_factor| DataRate {
                spreading_factor,
                bandwidth: DEFAULT_BANDWIDTH,
            })
            .collect()
    }

    /// Parses `SF10BW125` (case-insensitive).
    pub fn parse(s: &str) -> Result<Self, MapperError> {
        let invalid = || MapperError::InvalidDataRate(s.to_string());

        let upper = s.trim().to_ascii_uppercase();
        let rest = upper.strip_prefix("SF").ok_or_else(invalid)?;
        let (sf, bw) = rest.split_once("BW").ok_or_else(invalid)?;

        let spreading_factor = sf.parse::<u8>().map_err(|_| invalid())?;
        let bandwidth = bw.parse::<u16>().map_err(|_| invalid())?;

        Self::with_bandwidth(spreading_factor, bandwidth)
    }
}

impl Default for DataRate {
    fn default() -> Self {
        Self::slowest()
    }
}

impl fmt::Display for DataRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}BW{}", self.spreading_factor, self.bandwidth)
    }
}

impl FromStr for DataRate {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

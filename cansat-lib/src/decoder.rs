use chrono::{DateTime, Utc};
use crossbeam::channel::{unbounded, Receiver};
use tracing::{debug, warn};

use crate::error::DecodeError;
use crate::events::{ChannelListener, Event, Listener};
use crate::framing::{tokenize, validate_frame, verify_checksum, FrameFormat};
use crate::telemetry::{coerce, CoercionPolicy, Reading, Vector3};

/// Result of a successful [PacketDecoder::decode].
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    /// The reading that is now current.
    pub reading: Reading,
    /// Mission time of this reading is lower than that of the reading it replaced.
    pub reset_detected: bool,
}

/// Decodes telemetry frames and keeps the most recent valid [Reading].
///
/// A frame only replaces the current reading if it passes every check: framing, field
/// count, checksum and (with [CoercionPolicy::Strict]) field parsing. A rejected frame
/// leaves the decoder exactly as it was.
///
/// # Examples
/// ```
/// use cansat::framing::{encode, FrameFormat};
/// use cansat::{Event, PacketDecoder, Reading};
///
/// let format = FrameFormat::default();
/// let mut decoder = PacketDecoder::new(format.clone());
/// let events = decoder.subscribe();
///
/// let frame = encode(
///     &Reading { header: "KAANSAT".into(), mission_time: 1000, altitude: 100.5, ..Default::default() },
///     &format,
/// );
/// decoder.decode(&frame).unwrap();
/// assert_eq!(decoder.altitude(), 100.5);
///
/// assert!(decoder.decode(b"garbage").is_err());
/// assert_eq!(decoder.altitude(), 100.5);
///
/// assert!(matches!(events.try_recv(), Ok(Event::DecodeSucceeded(_))));
/// assert!(matches!(events.try_recv(), Ok(Event::PacketError(_))));
/// ```
pub struct PacketDecoder {
    format: FrameFormat,
    policy: CoercionPolicy,
    current: Reading,
    csv_logging_enabled: bool,
    listeners: Vec<Box<dyn Listener>>,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self::new(FrameFormat::default())
    }
}

impl PacketDecoder {
    pub fn new(format: FrameFormat) -> Self {
        PacketDecoder {
            format,
            policy: CoercionPolicy::default(),
            current: Reading::default(),
            csv_logging_enabled: false,
            listeners: Vec::default(),
        }
    }

    pub fn with_policy(mut self, policy: CoercionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_listener(mut self, listener: impl Listener + 'static) -> Self {
        self.add_listener(listener);
        self
    }

    pub fn add_listener(&mut self, listener: impl Listener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Register a listener that forwards all future events to the returned channel.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (tx, rx) = unbounded();
        self.add_listener(ChannelListener::new(tx));
        rx
    }

    #[must_use]
    pub fn format(&self) -> &FrameFormat {
        &self.format
    }

    #[must_use]
    pub fn policy(&self) -> CoercionPolicy {
        self.policy
    }

    /// Decode a single frame, with the primary EOT already removed, and make it the
    /// current reading.
    ///
    /// # Errors
    /// The [DecodeError] that caused the frame to be rejected. The same error is emitted to
    /// listeners as [Event::PacketError].
    pub fn decode(&mut self, packet: &[u8]) -> Result<Decoded, DecodeError> {
        let candidate = match self.parse(packet) {
            Ok(reading) => reading,
            Err(err) => {
                debug!(kind = err.kind(), "dropping packet: {err}");
                self.emit(Event::PacketError(err.clone()));
                return Err(err);
            }
        };

        let previous = self.current.mission_time;
        let reset_detected = candidate.mission_time < previous;
        if reset_detected {
            warn!(
                previous,
                current = candidate.mission_time,
                "mission time went backwards; payload reset"
            );
            self.emit(Event::ResetDetected {
                previous,
                current: candidate.mission_time,
            });
        }

        self.current = candidate;
        if !self.listeners.is_empty() {
            self.emit(Event::DecodeSucceeded(self.current.clone()));
        }

        Ok(Decoded {
            reading: self.current.clone(),
            reset_detected,
        })
    }

    fn parse(&self, packet: &[u8]) -> Result<Reading, DecodeError> {
        let body = validate_frame(packet, &self.format)?;
        let tokens = tokenize(body, self.format.separator)?;
        verify_checksum(&tokens, self.format.separator)?;
        coerce(&tokens, self.policy)
    }

    fn emit(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    #[must_use]
    pub fn csv_logging_enabled(&self) -> bool {
        self.csv_logging_enabled
    }

    /// Advisory flag for whoever persists readings. It has no effect on decoding.
    pub fn set_csv_logging_enabled(&mut self, enabled: bool) {
        self.csv_logging_enabled = enabled;
        self.emit(Event::CsvLoggingEnabledChanged(enabled));
    }

    /// The current reading.
    #[must_use]
    pub fn reading(&self) -> &Reading {
        &self.current
    }

    /// An owned copy of the current reading.
    #[must_use]
    pub fn snapshot(&self) -> Reading {
        self.current.clone()
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.current.header
    }

    #[must_use]
    pub fn team_id(&self) -> i32 {
        self.current.team_id
    }

    #[must_use]
    pub fn packet_count(&self) -> i32 {
        self.current.packet_count
    }

    /// Milliseconds
    #[must_use]
    pub fn mission_time(&self) -> u64 {
        self.current.mission_time
    }

    #[must_use]
    pub fn altitude(&self) -> f64 {
        self.current.altitude
    }

    #[must_use]
    pub fn battery_voltage(&self) -> f64 {
        self.current.battery_voltage
    }

    #[must_use]
    pub fn relative_humidity(&self) -> f64 {
        self.current.relative_humidity
    }

    #[must_use]
    pub fn uv_radiation_index(&self) -> f64 {
        self.current.uv_radiation_index
    }

    #[must_use]
    pub fn internal_temperature(&self) -> f64 {
        self.current.internal_temp
    }

    #[must_use]
    pub fn external_temperature(&self) -> f64 {
        self.current.external_temp
    }

    #[must_use]
    pub fn atmospheric_pressure(&self) -> f64 {
        self.current.atmospheric_pressure
    }

    /// GPS time as a UTC timestamp.
    #[must_use]
    pub fn gps_time(&self) -> Option<DateTime<Utc>> {
        self.current.gps_timestamp()
    }

    #[must_use]
    pub fn gps_altitude(&self) -> f64 {
        self.current.gps_altitude
    }

    #[must_use]
    pub fn gps_velocity(&self) -> f64 {
        self.current.gps_velocity
    }

    #[must_use]
    pub fn gps_latitude(&self) -> f64 {
        self.current.gps_latitude
    }

    #[must_use]
    pub fn gps_longitude(&self) -> f64 {
        self.current.gps_longitude
    }

    #[must_use]
    pub fn gps_satellite_count(&self) -> i32 {
        self.current.satellite_count()
    }

    #[must_use]
    pub fn accelerometer(&self) -> Vector3 {
        self.current.accelerometer
    }

    #[must_use]
    pub fn gyroscope(&self) -> Vector3 {
        self.current.gyroscope
    }

    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.current.checksum
    }
}

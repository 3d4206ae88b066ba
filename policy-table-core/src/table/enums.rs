// policy-table-core/src/table/enums.rs
// ============================================================================
// Module: Policy Table Enumerated Domains
// Description: Enumerated token domains used by the policy document.
// Purpose: Convert between typed variants and canonical JSON tokens.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Each enumerated domain converts to its canonical JSON token via a total
//! `json_token` and back via a partial `from_json_token`. Unknown tokens make
//! the row carrying them get dropped rather than failing the whole load, so
//! policies produced by newer backends stay loadable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Priority
// ============================================================================

/// Application priority tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Priority {
    /// Emergency priority.
    #[serde(rename = "EMERGENCY")]
    Emergency,
    /// Navigation priority.
    #[serde(rename = "NAVIGATION")]
    Navigation,
    /// Voice communication priority.
    #[serde(rename = "VOICECOM")]
    VoiceCom,
    /// Communication priority.
    #[serde(rename = "COMMUNICATION")]
    Communication,
    /// Normal priority.
    #[serde(rename = "NORMAL")]
    Normal,
    /// No priority.
    #[default]
    #[serde(rename = "NONE")]
    None,
}

impl Priority {
    /// Returns the canonical JSON token.
    #[must_use]
    pub const fn json_token(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Navigation => "NAVIGATION",
            Self::VoiceCom => "VOICECOM",
            Self::Communication => "COMMUNICATION",
            Self::Normal => "NORMAL",
            Self::None => "NONE",
        }
    }

    /// Parses a canonical JSON token.
    #[must_use]
    pub fn from_json_token(token: &str) -> Option<Self> {
        match token {
            "EMERGENCY" => Some(Self::Emergency),
            "NAVIGATION" => Some(Self::Navigation),
            "VOICECOM" => Some(Self::VoiceCom),
            "COMMUNICATION" => Some(Self::Communication),
            "NORMAL" => Some(Self::Normal),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: HMI Level
// ============================================================================

/// Head-unit interaction tier gating what an application may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HmiLevel {
    /// Full user interaction.
    #[serde(rename = "FULL")]
    Full,
    /// Limited user interaction.
    #[serde(rename = "LIMITED")]
    Limited,
    /// Background execution only.
    #[serde(rename = "BACKGROUND")]
    Background,
    /// No interaction.
    #[serde(rename = "NONE")]
    None,
}

impl HmiLevel {
    /// Returns the canonical JSON token.
    #[must_use]
    pub const fn json_token(self) -> &'static str {
        match self {
            Self::Full => "FULL",
            Self::Limited => "LIMITED",
            Self::Background => "BACKGROUND",
            Self::None => "NONE",
        }
    }

    /// Parses a canonical JSON token.
    #[must_use]
    pub fn from_json_token(token: &str) -> Option<Self> {
        match token {
            "FULL" => Some(Self::Full),
            "LIMITED" => Some(Self::Limited),
            "BACKGROUND" => Some(Self::Background),
            "NONE" => Some(Self::None),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Parameter
// ============================================================================

/// Vehicle-data parameter an RPC may be permitted to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Parameter {
    /// GPS position data.
    #[serde(rename = "gps")]
    Gps,
    /// Vehicle speed.
    #[serde(rename = "speed")]
    Speed,
    /// Engine revolutions per minute.
    #[serde(rename = "rpm")]
    Rpm,
    /// Fuel level.
    #[serde(rename = "fuelLevel")]
    FuelLevel,
    /// Fuel level state.
    #[serde(rename = "fuelLevel_State")]
    FuelLevelState,
    /// Instant fuel consumption.
    #[serde(rename = "instantFuelConsumption")]
    InstantFuelConsumption,
    /// External temperature.
    #[serde(rename = "externalTemperature")]
    ExternalTemperature,
    /// Odometer reading.
    #[serde(rename = "odometer")]
    Odometer,
    /// Tire pressure status.
    #[serde(rename = "tirePressure")]
    TirePressure,
    /// Wiper status.
    #[serde(rename = "wiperStatus")]
    WiperStatus,
    /// Head lamp status.
    #[serde(rename = "headLampStatus")]
    HeadLampStatus,
    /// Seat belt status.
    #[serde(rename = "beltStatus")]
    BeltStatus,
    /// Driver braking status.
    #[serde(rename = "driverBraking")]
    DriverBraking,
    /// Transmission shift position.
    #[serde(rename = "prndl")]
    Prndl,
    /// Steering wheel angle.
    #[serde(rename = "steeringWheelAngle")]
    SteeringWheelAngle,
    /// Engine torque.
    #[serde(rename = "engineTorque")]
    EngineTorque,
    /// Accelerator pedal position.
    #[serde(rename = "accPedalPosition")]
    AccPedalPosition,
    /// Device status.
    #[serde(rename = "deviceStatus")]
    DeviceStatus,
    /// Body information.
    #[serde(rename = "bodyInformation")]
    BodyInformation,
    /// Vehicle identification number.
    #[serde(rename = "vin")]
    Vin,
    /// MyKey status.
    #[serde(rename = "myKey")]
    MyKey,
    /// First main text field.
    #[serde(rename = "mainField1")]
    MainField1,
    /// Second main text field.
    #[serde(rename = "mainField2")]
    MainField2,
}

impl Parameter {
    /// Returns the canonical JSON token.
    #[must_use]
    pub const fn json_token(self) -> &'static str {
        match self {
            Self::Gps => "gps",
            Self::Speed => "speed",
            Self::Rpm => "rpm",
            Self::FuelLevel => "fuelLevel",
            Self::FuelLevelState => "fuelLevel_State",
            Self::InstantFuelConsumption => "instantFuelConsumption",
            Self::ExternalTemperature => "externalTemperature",
            Self::Odometer => "odometer",
            Self::TirePressure => "tirePressure",
            Self::WiperStatus => "wiperStatus",
            Self::HeadLampStatus => "headLampStatus",
            Self::BeltStatus => "beltStatus",
            Self::DriverBraking => "driverBraking",
            Self::Prndl => "prndl",
            Self::SteeringWheelAngle => "steeringWheelAngle",
            Self::EngineTorque => "engineTorque",
            Self::AccPedalPosition => "accPedalPosition",
            Self::DeviceStatus => "deviceStatus",
            Self::BodyInformation => "bodyInformation",
            Self::Vin => "vin",
            Self::MyKey => "myKey",
            Self::MainField1 => "mainField1",
            Self::MainField2 => "mainField2",
        }
    }

    /// Parses a canonical JSON token.
    #[must_use]
    pub fn from_json_token(token: &str) -> Option<Self> {
        match token {
            "gps" => Some(Self::Gps),
            "speed" => Some(Self::Speed),
            "rpm" => Some(Self::Rpm),
            "fuelLevel" => Some(Self::FuelLevel),
            "fuelLevel_State" => Some(Self::FuelLevelState),
            "instantFuelConsumption" => Some(Self::InstantFuelConsumption),
            "externalTemperature" => Some(Self::ExternalTemperature),
            "odometer" => Some(Self::Odometer),
            "tirePressure" => Some(Self::TirePressure),
            "wiperStatus" => Some(Self::WiperStatus),
            "headLampStatus" => Some(Self::HeadLampStatus),
            "beltStatus" => Some(Self::BeltStatus),
            "driverBraking" => Some(Self::DriverBraking),
            "prndl" => Some(Self::Prndl),
            "steeringWheelAngle" => Some(Self::SteeringWheelAngle),
            "engineTorque" => Some(Self::EngineTorque),
            "accPedalPosition" => Some(Self::AccPedalPosition),
            "deviceStatus" => Some(Self::DeviceStatus),
            "bodyInformation" => Some(Self::BodyInformation),
            "vin" => Some(Self::Vin),
            "myKey" => Some(Self::MyKey),
            "mainField1" => Some(Self::MainField1),
            "mainField2" => Some(Self::MainField2),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Application HMI Type
// ============================================================================

/// Declared application category on the head unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppHmiType {
    /// Default application type.
    #[serde(rename = "DEFAULT")]
    Default,
    /// Communication application.
    #[serde(rename = "COMMUNICATION")]
    Communication,
    /// Media application.
    #[serde(rename = "MEDIA")]
    Media,
    /// Messaging application.
    #[serde(rename = "MESSAGING")]
    Messaging,
    /// Navigation application.
    #[serde(rename = "NAVIGATION")]
    Navigation,
    /// Information application.
    #[serde(rename = "INFORMATION")]
    Information,
    /// Social application.
    #[serde(rename = "SOCIAL")]
    Social,
    /// Background process.
    #[serde(rename = "BACKGROUND_PROCESS")]
    BackgroundProcess,
    /// Testing application.
    #[serde(rename = "TESTING")]
    Testing,
    /// System application.
    #[serde(rename = "SYSTEM")]
    System,
}

impl AppHmiType {
    /// Returns the canonical JSON token.
    #[must_use]
    pub const fn json_token(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Communication => "COMMUNICATION",
            Self::Media => "MEDIA",
            Self::Messaging => "MESSAGING",
            Self::Navigation => "NAVIGATION",
            Self::Information => "INFORMATION",
            Self::Social => "SOCIAL",
            Self::BackgroundProcess => "BACKGROUND_PROCESS",
            Self::Testing => "TESTING",
            Self::System => "SYSTEM",
        }
    }

    /// Parses a canonical JSON token.
    #[must_use]
    pub fn from_json_token(token: &str) -> Option<Self> {
        match token {
            "DEFAULT" => Some(Self::Default),
            "COMMUNICATION" => Some(Self::Communication),
            "MEDIA" => Some(Self::Media),
            "MESSAGING" => Some(Self::Messaging),
            "NAVIGATION" => Some(Self::Navigation),
            "INFORMATION" => Some(Self::Information),
            "SOCIAL" => Some(Self::Social),
            "BACKGROUND_PROCESS" => Some(Self::BackgroundProcess),
            "TESTING" => Some(Self::Testing),
            "SYSTEM" => Some(Self::System),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Request Type
// ============================================================================

/// System-request kind an application may issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RequestType {
    /// Plain HTTP request.
    #[serde(rename = "HTTP")]
    Http,
    /// File resume request.
    #[serde(rename = "FILE_RESUME")]
    FileResume,
    /// Authentication request.
    #[serde(rename = "AUTH_REQUEST")]
    AuthRequest,
    /// Authentication challenge.
    #[serde(rename = "AUTH_CHALLENGE")]
    AuthChallenge,
    /// Authentication acknowledgement.
    #[serde(rename = "AUTH_ACK")]
    AuthAck,
    /// Proprietary request.
    #[serde(rename = "PROPRIETARY")]
    Proprietary,
    /// Application catalog query.
    #[serde(rename = "QUERY_APPS")]
    QueryApps,
    /// Application launch request.
    #[serde(rename = "LAUNCH_APP")]
    LaunchApp,
    /// Lock screen icon URL request.
    #[serde(rename = "LOCK_SCREEN_ICON_URL")]
    LockScreenIconUrl,
    /// Traffic message channel request.
    #[serde(rename = "TRAFFIC_MESSAGE_CHANNEL")]
    TrafficMessageChannel,
    /// Driver profile request.
    #[serde(rename = "DRIVER_PROFILE")]
    DriverProfile,
    /// Voice search request.
    #[serde(rename = "VOICE_SEARCH")]
    VoiceSearch,
    /// Navigation request.
    #[serde(rename = "NAVIGATION")]
    Navigation,
    /// Phone request.
    #[serde(rename = "PHONE")]
    Phone,
    /// Climate request.
    #[serde(rename = "CLIMATE")]
    Climate,
    /// Settings request.
    #[serde(rename = "SETTINGS")]
    Settings,
    /// Vehicle diagnostics request.
    #[serde(rename = "VEHICLE_DIAGNOSTICS")]
    VehicleDiagnostics,
    /// Emergency request.
    #[serde(rename = "EMERGENCY")]
    Emergency,
    /// Media request.
    #[serde(rename = "MEDIA")]
    Media,
    /// Firmware-over-the-air request.
    #[serde(rename = "FOTA")]
    Fota,
}

impl RequestType {
    /// Returns the canonical JSON token.
    #[must_use]
    pub const fn json_token(self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::FileResume => "FILE_RESUME",
            Self::AuthRequest => "AUTH_REQUEST",
            Self::AuthChallenge => "AUTH_CHALLENGE",
            Self::AuthAck => "AUTH_ACK",
            Self::Proprietary => "PROPRIETARY",
            Self::QueryApps => "QUERY_APPS",
            Self::LaunchApp => "LAUNCH_APP",
            Self::LockScreenIconUrl => "LOCK_SCREEN_ICON_URL",
            Self::TrafficMessageChannel => "TRAFFIC_MESSAGE_CHANNEL",
            Self::DriverProfile => "DRIVER_PROFILE",
            Self::VoiceSearch => "VOICE_SEARCH",
            Self::Navigation => "NAVIGATION",
            Self::Phone => "PHONE",
            Self::Climate => "CLIMATE",
            Self::Settings => "SETTINGS",
            Self::VehicleDiagnostics => "VEHICLE_DIAGNOSTICS",
            Self::Emergency => "EMERGENCY",
            Self::Media => "MEDIA",
            Self::Fota => "FOTA",
        }
    }

    /// Parses a canonical JSON token.
    #[must_use]
    pub fn from_json_token(token: &str) -> Option<Self> {
        match token {
            "HTTP" => Some(Self::Http),
            "FILE_RESUME" => Some(Self::FileResume),
            "AUTH_REQUEST" => Some(Self::AuthRequest),
            "AUTH_CHALLENGE" => Some(Self::AuthChallenge),
            "AUTH_ACK" => Some(Self::AuthAck),
            "PROPRIETARY" => Some(Self::Proprietary),
            "QUERY_APPS" => Some(Self::QueryApps),
            "LAUNCH_APP" => Some(Self::LaunchApp),
            "LOCK_SCREEN_ICON_URL" => Some(Self::LockScreenIconUrl),
            "TRAFFIC_MESSAGE_CHANNEL" => Some(Self::TrafficMessageChannel),
            "DRIVER_PROFILE" => Some(Self::DriverProfile),
            "VOICE_SEARCH" => Some(Self::VoiceSearch),
            "NAVIGATION" => Some(Self::Navigation),
            "PHONE" => Some(Self::Phone),
            "CLIMATE" => Some(Self::Climate),
            "SETTINGS" => Some(Self::Settings),
            "VEHICLE_DIAGNOSTICS" => Some(Self::VehicleDiagnostics),
            "EMERGENCY" => Some(Self::Emergency),
            "MEDIA" => Some(Self::Media),
            "FOTA" => Some(Self::Fota),
            _ => None,
        }
    }
}

// Resource DTOs
//
// Payload shapes for the REST endpoints. The client decodes them but never
// interprets or normalizes their contents.

pub mod config;
pub mod system;

pub use config::{
    Config, DeviceConfiguration, DeviceHeader, FolderConfiguration, GuiConfiguration,
    LdapConfiguration, MinDiskFree, OptionsConfiguration, Versioning,
};
pub use system::{
    ConfigInSync, Connection, Connections, DebugFacilities, DiscoveryEntry, ErrorList,
    ListenerStatus, LogEntry, LogMessages, Ping, SystemStatus, UpgradeInfo, VersionInfo,
};

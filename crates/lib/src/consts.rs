/// Application name, used for config directory lookup.
pub const APP_NAME: &str = "confrag";

/// Length of the truncated hex digest used for fragment-set and manifest ids.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Type identifier carried by fragments built from instance entities.
pub const INSTANCE_TYPE: &str = "instance";

/// Type identifier carried by fragments built from rule entities.
pub const RULE_TYPE: &str = "rule";

/// Component kind used when the configuration does not name one.
pub const DEFAULT_COMPONENT_KIND: &str = "mixer";

/// Destination name used when a producer service does not name one.
pub const DEFAULT_DESTINATION: &str = "default";

/// Default depth of the processor's event channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

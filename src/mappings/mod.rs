mod tracked_keys;

pub use tracked_keys::TrackedKeyNames;

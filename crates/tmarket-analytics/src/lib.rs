pub mod geoip;
pub mod keys;
pub mod memory;
pub mod recorder;
pub mod reporter;
pub mod value;

pub use geoip::HttpCountryResolver;
pub use memory::MemoryStore;
pub use recorder::EventRecorder;
pub use reporter::AnalyticsReporter;

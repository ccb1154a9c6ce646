mod hub_command;
mod participant_record;
mod relay_hub;

pub use hub_command::*;
pub use participant_record::*;
pub use relay_hub::*;

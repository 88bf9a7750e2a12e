// Ad decision domain: rules, inventory, capacity and the ports around them

pub mod entities;
pub mod ports;
pub mod services;
pub mod utils;
pub mod value_objects;

pub use entities::*;
pub use ports::*;
pub use services::{
    count_ad_slots, count_keyword_slots, count_slots, is_bot_user_agent, select_publisher_default,
    select_rule, select_user_agent_rule, KEYWORD_SLOT_MARKER,
};
pub use utils::*;
pub use value_objects::*;

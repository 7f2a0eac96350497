pub mod subscription_handler;

pub use subscription_handler::{
    __path_create_checkout, __path_get_status, __path_list_plans, create_checkout, get_status,
    list_plans,
};

pub mod config;
pub mod error;
pub mod router;
pub mod state;

pub mod db {
    pub mod memory;
    pub mod store;
}

pub mod models {
    pub mod kinds;
    pub mod public;
    pub mod records;
    pub mod validation;
}

pub mod api {
    pub mod errors;
    pub mod health;
    pub mod products;
    pub mod records;
}

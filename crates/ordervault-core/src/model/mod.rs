pub mod delivery;
pub mod item;
pub mod order;
pub mod payment;

pub use delivery::Delivery;
pub use item::Item;
pub use order::Order;
pub use payment::Payment;

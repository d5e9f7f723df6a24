pub mod categories;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

pub use categories::Entity as Categories;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use suppliers::Entity as Suppliers;
pub use users::Entity as Users;

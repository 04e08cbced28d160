mod account;
mod catalog;
mod envelope;
mod favorite;
mod order;
mod state;
mod verification;

pub use account::{
    Account, AccountChanges, AccountUpdateRequest, INVALID_EMAIL, INVALID_USERNAME, NewAccount,
    Party, ResendRequest, Role, SigninRequest, SignupRequest, WEAK_PASSWORD,
};
pub use catalog::{
    Category, CategoryChanges, CreateCategoryRequest, CreateServiceRequest, NewCategory,
    NewService, Service, ServiceChanges, ServiceView, Subcategory, SubcategoryInput,
    UpdateCategoryRequest, UpdateServiceRequest,
};
pub use envelope::{Envelope, Status};
pub use favorite::{CreateFavoriteRequest, Favorite, FavoriteView};
pub use order::{
    CreateOrderRequest, NewOrder, Order, OrderChanges, OrderParty, OrderStatus, OrderView,
    UpdateOrderRequest,
};
pub use state::AppState;
pub use verification::{IssuedToken, VerificationToken};

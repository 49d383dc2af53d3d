//! Per-resource repositories over one shared pool.

mod accounts;
mod baskets;
mod banners;
mod categories;
mod orders;
mod product_sizes;
mod products;
mod reviews;
mod samples;
mod subcategories;

pub use accounts::{AccountKind, AccountRepo};
pub use banners::BannerRepo;
pub use baskets::{BasketKind, BasketRepo};
pub use categories::CategoryRepo;
pub use orders::OrderRepo;
pub use product_sizes::ProductSizeRepo;
pub use products::{ProductFilter, ProductRepo};
pub use reviews::ReviewRepo;
pub use samples::SampleRepo;
pub use subcategories::SubcategoryRepo;

use sqlx::SqlitePool;

/// Every repository, constructed once at startup and shared through router state.
#[derive(Debug, Clone)]
pub struct Repositories {
    pub categories: CategoryRepo,
    pub subcategories: SubcategoryRepo,
    pub product_sizes: ProductSizeRepo,
    pub products: ProductRepo,
    pub carts: BasketRepo,
    pub wishlists: BasketRepo,
    pub orders: OrderRepo,
    pub reviews: ReviewRepo,
    pub users: AccountRepo,
    pub admins: AccountRepo,
    pub banners: BannerRepo,
    pub samples: SampleRepo,
}

impl Repositories {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            categories: CategoryRepo::new(pool.clone()),
            subcategories: SubcategoryRepo::new(pool.clone()),
            product_sizes: ProductSizeRepo::new(pool.clone()),
            products: ProductRepo::new(pool.clone()),
            carts: BasketRepo::new(pool.clone(), BasketKind::Cart),
            wishlists: BasketRepo::new(pool.clone(), BasketKind::Wishlist),
            orders: OrderRepo::new(pool.clone()),
            reviews: ReviewRepo::new(pool.clone()),
            users: AccountRepo::new(pool.clone(), AccountKind::User),
            admins: AccountRepo::new(pool.clone(), AccountKind::Admin),
            banners: BannerRepo::new(pool.clone()),
            samples: SampleRepo::new(pool),
        }
    }

    pub fn accounts(&self, kind: AccountKind) -> &AccountRepo {
        match kind {
            AccountKind::User => &self.users,
            AccountKind::Admin => &self.admins,
        }
    }

    pub fn baskets(&self, kind: BasketKind) -> &BasketRepo {
        match kind {
            BasketKind::Cart => &self.carts,
            BasketKind::Wishlist => &self.wishlists,
        }
    }
}

//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - catalogue tables (`categories`, `subcategories`, `product_sizes`, `products`)
/// - per-user baskets (`cart_items`, `wishlist_items`) and `orders`
/// - `reviews`, accounts (`users`, `admins`), `banners` and `samples`
///
/// Asset columns (`images`, `image_public_id`) hold JSON arrays of equal length.
/// Relations are plain integer columns; they are validated by the repositories.
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Catalogue
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    color TEXT NOT NULL DEFAULT '',
    images TEXT NOT NULL DEFAULT '[]', -- JSON array of urls
    image_public_id TEXT NOT NULL DEFAULT '[]' -- JSON array of host ids
);

CREATE TABLE IF NOT EXISTS subcategories (
    id INTEGER PRIMARY KEY NOT NULL,
    category INTEGER NOT NULL,
    subcategory TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_subcategories_category ON subcategories(category);

CREATE TABLE IF NOT EXISTS product_sizes (
    id INTEGER PRIMARY KEY NOT NULL,
    productsize TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    images TEXT NOT NULL DEFAULT '[]',
    image_public_id TEXT NOT NULL DEFAULT '[]',
    brand TEXT NOT NULL DEFAULT '',
    oldprice REAL NOT NULL DEFAULT 0,
    newprice REAL NOT NULL DEFAULT 0,
    category INTEGER NOT NULL,
    cat_name TEXT NOT NULL DEFAULT '',
    subcategory INTEGER NOT NULL,
    count_in_stock INTEGER NOT NULL DEFAULT 0,
    discount REAL NOT NULL DEFAULT 0,
    product_weight REAL NOT NULL DEFAULT 0,
    rating REAL NOT NULL DEFAULT 0,
    productsize TEXT NOT NULL DEFAULT '[]', -- JSON array of product_sizes ids
    color TEXT NOT NULL DEFAULT '[]', -- JSON array
    is_featured INTEGER NOT NULL DEFAULT 0,
    search_text TEXT NOT NULL DEFAULT '', -- case-folded name, brand and cat_name
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
CREATE INDEX IF NOT EXISTS idx_products_subcategory ON products(subcategory);
CREATE INDEX IF NOT EXISTS idx_products_featured ON products(is_featured);

-- ---------------------------------------------------------------------------
-- Baskets (one (product_id, user_id) per row)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS cart_items (
    id INTEGER PRIMARY KEY NOT NULL,
    product_name TEXT NOT NULL DEFAULT '',
    images TEXT NOT NULL DEFAULT '[]',
    image_public_id TEXT NOT NULL DEFAULT '[]',
    rating REAL NOT NULL DEFAULT 0,
    price REAL NOT NULL DEFAULT 0,
    quantity INTEGER NOT NULL DEFAULT 0,
    subtotal REAL NOT NULL DEFAULT 0,
    product_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    product_size TEXT NOT NULL DEFAULT '',
    product_color TEXT NOT NULL DEFAULT '',
    UNIQUE(product_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_cart_items_user ON cart_items(user_id);

CREATE TABLE IF NOT EXISTS wishlist_items (
    id INTEGER PRIMARY KEY NOT NULL,
    product_name TEXT NOT NULL DEFAULT '',
    images TEXT NOT NULL DEFAULT '[]',
    image_public_id TEXT NOT NULL DEFAULT '[]',
    rating REAL NOT NULL DEFAULT 0,
    price REAL NOT NULL DEFAULT 0,
    quantity INTEGER NOT NULL DEFAULT 0,
    subtotal REAL NOT NULL DEFAULT 0,
    product_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    product_size TEXT NOT NULL DEFAULT '',
    product_color TEXT NOT NULL DEFAULT '',
    UNIQUE(product_id, user_id)
);

CREATE INDEX IF NOT EXISTS idx_wishlist_items_user ON wishlist_items(user_id);

-- ---------------------------------------------------------------------------
-- Orders (product snapshots embedded as JSON)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS orders (
    id INTEGER PRIMARY KEY NOT NULL,
    order_id TEXT NOT NULL UNIQUE, -- uuid v4
    user_id INTEGER NOT NULL,
    products TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY NOT NULL,
    product_id INTEGER NOT NULL,
    customer_name TEXT NOT NULL DEFAULT '',
    customer_id INTEGER NULL,
    review TEXT NOT NULL DEFAULT '',
    rating REAL NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reviews_product ON reviews(product_id);

-- ---------------------------------------------------------------------------
-- Accounts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NULL UNIQUE,
    password TEXT NULL, -- argon2 PHC string
    image TEXT NOT NULL DEFAULT '',
    image_public_id TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS admins (
    id INTEGER PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    phone TEXT NULL UNIQUE,
    password TEXT NULL,
    image TEXT NOT NULL DEFAULT '',
    image_public_id TEXT NOT NULL DEFAULT ''
);

-- ---------------------------------------------------------------------------
-- Storefront content
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS banners (
    id INTEGER PRIMARY KEY NOT NULL,
    image TEXT NOT NULL,
    image_public_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS samples (
    id INTEGER PRIMARY KEY NOT NULL,
    product_name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL UNIQUE,
    images TEXT NOT NULL DEFAULT '[]',
    image_public_id TEXT NOT NULL DEFAULT '[]'
);
"#;

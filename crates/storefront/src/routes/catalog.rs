//! Product listing handlers.
//!
//! Listing URLs are segment based:
//!
//! ```text
//! /                     page 1, every category
//! /Page2                page 2, every category
//! /Soccer               page 1 of Soccer
//! /Soccer/Page2         page 2 of Soccer
//! /Products/Page2       page 2, every category
//! ```
//!
//! The router cannot match a `Page` prefix inside a segment, so handlers take
//! the raw segment and [`ListingSegment::parse`] decides what it is.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use sportsstore_core::{PagingInfo, Product, ProductQuery};

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalUser, SessionCart};
use crate::routes::PageChrome;
use crate::state::AppState;

/// What a single listing path segment names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSegment {
    /// `Page{n}`: a page of every category.
    Page(i32),
    /// Anything else: page 1 of that category.
    Category(String),
}

impl ListingSegment {
    /// Parse a segment. `Page` followed by an `i32` is a page number;
    /// anything else, including `Page` with a malformed number, is a category.
    #[must_use]
    pub fn parse(segment: &str) -> Self {
        parse_page(segment).map_or_else(|| Self::Category(segment.to_owned()), Self::Page)
    }
}

/// Parse `Page{n}` into `n`.
#[must_use]
pub fn parse_page(segment: &str) -> Option<i32> {
    segment.strip_prefix("Page")?.parse().ok()
}

/// URL of a listing page.
#[must_use]
pub fn listing_url(category: Option<&str>, page: u32) -> String {
    match category {
        Some(category) => format!("/{}/Page{page}", urlencoding::encode(category)),
        None => format!("/Page{page}"),
    }
}

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_i32(),
            price: product.price.display(),
            name: product.name,
            description: product.description,
            category: product.category,
        }
    }
}

/// One link in the page navigation.
#[derive(Clone)]
pub struct PageLink {
    pub number: u32,
    pub url: String,
    pub is_current: bool,
}

/// One entry in the category navigation.
#[derive(Clone)]
pub struct CategoryLink {
    pub name: String,
    pub url: String,
    pub is_current: bool,
}

/// Product listing template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/list.html")]
pub struct ListTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryLink>,
    pub current_category: Option<String>,
    pub pages: Vec<PageLink>,
    /// Path of this page, so "add to cart" can come back here.
    pub return_url: String,
}

fn page_links(category: Option<&str>, paging: &PagingInfo) -> Vec<PageLink> {
    (1..=paging.total_pages())
        .map(|number| PageLink {
            number,
            url: listing_url(category, number),
            is_current: number == paging.current_page,
        })
        .collect()
}

async fn render_listing(
    state: &AppState,
    cart: &SessionCart,
    user: OptionalUser,
    category: Option<String>,
    page: i64,
) -> Result<ListTemplate> {
    let repo = ProductRepository::new(state.catalog_pool());
    let query = ProductQuery::new(category, page, state.config().page_size);
    let listing = repo.list_page(&query).await?;

    if let Some(category) = &query.category
        && listing.paging.total_items == 0
    {
        return Err(AppError::NotFound(format!("category {category}")));
    }
    if listing.paging.is_out_of_range() {
        return Err(AppError::NotFound(format!("page {}", query.page())));
    }

    let current = query.category.as_deref();
    let categories = repo
        .categories()
        .await?
        .into_iter()
        .map(|name| CategoryLink {
            url: listing_url(Some(&name), 1),
            is_current: current == Some(name.as_str()),
            name,
        })
        .collect();

    Ok(ListTemplate {
        chrome: PageChrome::new(cart, user.0.as_ref()),
        products: listing.products.into_iter().map(ProductView::from).collect(),
        categories,
        pages: page_links(current, &listing.paging),
        return_url: listing_url(current, query.page()),
        current_category: query.category,
    })
}

/// First page of every category (`/`, `/Home`, `/Home/Index`).
#[instrument(skip(state, cart, user))]
pub async fn index(
    State(state): State<AppState>,
    cart: SessionCart,
    user: OptionalUser,
) -> Result<ListTemplate> {
    render_listing(&state, &cart, user, None, 1).await
}

/// `/{segment}`: either `Page{n}` or a category name.
#[instrument(skip(state, cart, user))]
pub async fn segment(
    State(state): State<AppState>,
    Path(segment): Path<String>,
    cart: SessionCart,
    user: OptionalUser,
) -> Result<ListTemplate> {
    match ListingSegment::parse(&segment) {
        ListingSegment::Page(page) => {
            render_listing(&state, &cart, user, None, i64::from(page)).await
        }
        ListingSegment::Category(category) => {
            render_listing(&state, &cart, user, Some(category), 1).await
        }
    }
}

/// `/{category}/Page{n}`.
#[instrument(skip(state, cart, user))]
pub async fn category_page(
    State(state): State<AppState>,
    Path((category, page)): Path<(String, String)>,
    cart: SessionCart,
    user: OptionalUser,
) -> Result<ListTemplate> {
    let page = parse_page(&page).ok_or_else(|| AppError::NotFound(format!("/{category}/{page}")))?;
    render_listing(&state, &cart, user, Some(category), i64::from(page)).await
}

/// `/Products/Page{n}`.
#[instrument(skip(state, cart, user))]
pub async fn products_page(
    State(state): State<AppState>,
    Path(page): Path<String>,
    cart: SessionCart,
    user: OptionalUser,
) -> Result<ListTemplate> {
    let page = parse_page(&page).ok_or_else(|| AppError::NotFound(format!("/Products/{page}")))?;
    render_listing(&state, &cart, user, None, i64::from(page)).await
}

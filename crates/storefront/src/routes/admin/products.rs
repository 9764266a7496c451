//! Admin catalog management: list, detail, create, edit and delete products.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use sportsstore_core::validation::message_for;
use sportsstore_core::{FieldError, Price, Product, ProductId};

use super::{AdminChrome, flash};
use crate::db::{ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::routes::catalog::ProductView;
use crate::state::AppState;

/// Product list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/index.html")]
pub struct ProductListTemplate {
    pub admin: AdminChrome,
    pub products: Vec<ProductView>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/show.html")]
pub struct ProductShowTemplate {
    pub admin: AdminChrome,
    pub product: ProductView,
}

/// Values shown in the product form, kept as typed so a bad price can be
/// shown back to the admin unchanged.
#[derive(Clone, Default)]
pub struct ProductFormValues {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
}

impl From<&Product> for ProductFormValues {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.amount().to_string(),
            category: product.category.clone(),
        }
    }
}

/// Create/edit form template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products/edit.html")]
pub struct ProductEditTemplate {
    pub admin: AdminChrome,
    pub form: ProductFormValues,
    pub errors: Vec<FieldError>,
}

impl ProductEditTemplate {
    /// Message for a field, or empty when it passed.
    #[must_use]
    pub fn error_for(&self, field: &str) -> &'static str {
        message_for(&self.errors, field).unwrap_or("")
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.form.id == 0
    }
}

/// Product form data.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: String,
}

impl ProductForm {
    /// Turn the form into a product, or the list of fields to fix.
    ///
    /// # Errors
    ///
    /// Returns every field that failed, including an unparseable price.
    pub fn into_product(self) -> std::result::Result<Product, (ProductFormValues, Vec<FieldError>)> {
        let values = ProductFormValues {
            id: self.id,
            name: self.name.trim().to_owned(),
            description: self.description.trim().to_owned(),
            price: self.price.trim().to_owned(),
            category: self.category.trim().to_owned(),
        };

        // A bad price is reported once; the placeholder passes `validate`.
        let (price, price_error) = match Price::parse_listed(&values.price) {
            Ok(price) => (price, None),
            Err(e) => (
                Price::MIN_LISTED.into(),
                Some(FieldError::new("price", e.form_message())),
            ),
        };

        let product = Product {
            id: ProductId::new(values.id),
            name: values.name.clone(),
            description: values.description.clone(),
            price,
            category: values.category.clone(),
        };

        let mut errors = product.validate();
        errors.extend(price_error);
        if errors.is_empty() {
            Ok(product)
        } else {
            Err((values, errors))
        }
    }
}

async fn load(state: &AppState, id: i32) -> Result<Product> {
    ProductRepository::new(state.catalog_pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// List every product.
#[instrument(skip(state, session, user))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
) -> Result<ProductListTemplate> {
    let products = ProductRepository::new(state.catalog_pool())
        .list_all()
        .await?;

    Ok(ProductListTemplate {
        admin: AdminChrome::take(&session, &user).await,
        products: products.into_iter().map(ProductView::from).collect(),
    })
}

/// Product detail.
#[instrument(skip(state, session, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<ProductShowTemplate> {
    let product = load(&state, id).await?;

    Ok(ProductShowTemplate {
        admin: AdminChrome::take(&session, &user).await,
        product: ProductView::from(product),
    })
}

/// Empty form for a new product.
#[instrument(skip(session, user))]
pub async fn new(session: Session, RequireAdmin(user): RequireAdmin) -> ProductEditTemplate {
    ProductEditTemplate {
        admin: AdminChrome::take(&session, &user).await,
        form: ProductFormValues::default(),
        errors: Vec::new(),
    }
}

/// Form for an existing product.
#[instrument(skip(state, session, user))]
pub async fn edit(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<ProductEditTemplate> {
    let product = load(&state, id).await?;

    Ok(ProductEditTemplate {
        admin: AdminChrome::take(&session, &user).await,
        form: ProductFormValues::from(&product),
        errors: Vec::new(),
    })
}

/// Save a product: insert when the id is 0, update otherwise.
///
/// Invalid input re-renders the form with 422.
#[instrument(skip(state, session, user))]
pub async fn save(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let mut product = match form.into_product() {
        Ok(product) => product,
        Err((values, errors)) => {
            let page = ProductEditTemplate {
                admin: AdminChrome::take(&session, &user).await,
                form: values,
                errors,
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
        }
    };

    ProductRepository::new(state.catalog_pool())
        .save(&mut product)
        .await?;

    tracing::info!(product_id = %product.id, admin = %user.user_name, "Product saved");
    flash(&session, format!("{} has been saved", product.name)).await;

    Ok(Redirect::to("/admin/products").into_response())
}

/// Delete a product.
///
/// A product that orders still reference cannot be deleted; the admin is
/// told so on the product list instead of getting an error page.
#[instrument(skip(state, session, user))]
pub async fn delete(
    State(state): State<AppState>,
    session: Session,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Redirect> {
    let product = load(&state, id).await?;

    match ProductRepository::new(state.catalog_pool())
        .delete(product.id)
        .await
    {
        Ok(()) => {
            tracing::info!(product_id = id, admin = %user.user_name, "Product deleted");
            flash(&session, format!("{} was deleted", product.name)).await;
        }
        Err(RepositoryError::Conflict(_)) => {
            flash(
                &session,
                format!("{} is part of an order and cannot be deleted", product.name),
            )
            .await;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/admin/products"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(price: &str) -> ProductForm {
        ProductForm {
            id: 0,
            name: "Kayak".to_string(),
            description: "A boat for one person".to_string(),
            price: price.to_string(),
            category: "Watersports".to_string(),
        }
    }

    #[test]
    fn test_valid_form_becomes_product() {
        let product = form("275.00").into_product();
        assert!(product.is_ok_and(|p| p.id.is_new() && p.price == Price::from_cents(27500)));
    }

    #[test]
    fn test_bad_price_is_a_field_error() {
        let Err((values, errors)) = form("cheap").into_product() else {
            panic!("expected a field error");
        };
        assert_eq!(values.price, "cheap");
        assert_eq!(message_for(&errors, "price"), Some("Please enter a price"));

        let Err((_, errors)) = form("0").into_product() else {
            panic!("expected a field error");
        };
        assert_eq!(
            message_for(&errors, "price"),
            Some("Please enter a positive price")
        );

        let Err((_, errors)) = form("123456789.00").into_product() else {
            panic!("expected a field error");
        };
        assert_eq!(
            message_for(&errors, "price"),
            Some("Please enter a price of at most $99,999,999.99")
        );

        let Err((_, errors)) = form("1.005").into_product() else {
            panic!("expected a field error");
        };
        assert_eq!(message_for(&errors, "price"), Some("Please enter a price in whole cents"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_blank_fields_are_reported() {
        let blank = ProductForm {
            name: "  ".to_string(),
            category: String::new(),
            ..form("10")
        };
        let Err((_, errors)) = blank.into_product() else {
            panic!("expected field errors");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["name", "category"]);
    }
}

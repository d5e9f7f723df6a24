use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, LoginUser, VerifyResponse},
        categories::{CategoryList, CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest},
        dashboard::{DashboardSummary, HighestSale, StockAlert, TopSeller},
        orders::{
            CartLine, CartOrderRequest, OrderList, OrderResponse, OrderView, OrderedProduct,
            PlaceOrderRequest, Purchaser, Receipt, ReceiptLine, ReceiptResponse,
        },
        products::{CreateProductRequest, ProductCatalog, ProductResponse, UpdateProductRequest},
        suppliers::{CreateSupplierRequest, SupplierList, SupplierResponse, UpdateSupplierRequest},
        users::{CreateUserRequest, UpdateUserRequest, UserList, UserResponse},
    },
    models::{Category, Order, Product, ProductDetail, Role, Supplier, User},
    response::ApiResponse,
    routes::{auth, categories, dashboard, health, orders, products, suppliers, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::verify,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        suppliers::list_suppliers,
        suppliers::create_supplier,
        suppliers::update_supplier,
        suppliers::delete_supplier,
        products::list_products,
        products::create_product,
        products::update_product,
        products::delete_product,
        users::list_users,
        users::create_user,
        users::get_user,
        users::update_user,
        users::delete_user,
        orders::place_order,
        orders::place_cart_order,
        orders::list_orders,
        dashboard::summary
    ),
    components(
        schemas(
            Role,
            User,
            Category,
            Supplier,
            Product,
            ProductDetail,
            Order,
            LoginRequest,
            LoginUser,
            LoginResponse,
            VerifyResponse,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryList,
            CategoryResponse,
            CreateSupplierRequest,
            UpdateSupplierRequest,
            SupplierList,
            SupplierResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductCatalog,
            ProductResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserList,
            UserResponse,
            PlaceOrderRequest,
            CartLine,
            CartOrderRequest,
            OrderResponse,
            ReceiptLine,
            Receipt,
            ReceiptResponse,
            OrderedProduct,
            Purchaser,
            OrderView,
            OrderList,
            StockAlert,
            TopSeller,
            HighestSale,
            DashboardSummary,
            health::HealthData,
            ApiResponse<LoginResponse>,
            ApiResponse<ProductCatalog>,
            ApiResponse<OrderList>,
            ApiResponse<DashboardSummary>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login and token verification"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Suppliers", description = "Supplier endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Users", description = "User management endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "Dashboard", description = "Admin summary endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_api_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/category/{id}",
            "/api/products/add",
            "/api/order/place-order",
            "/api/dashboard",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}

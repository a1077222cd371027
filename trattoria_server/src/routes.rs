//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST delegate to the engine APIs. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, calls to the payment gateway)
//! should be expressed as futures or asynchronous functions. Async handlers get executed concurrently by worker threads
//! and thus don’t block execution.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use trattoria_engine::{
    db_types::{MenuItemUpdate, NewMenuItem},
    order_objects::{ModifyOrderRequest, OrderQueryFilter, PaymentOptions, PlaceOrderRequest},
    traits::{CatalogManagement, OrderManagement, PaymentProvider},
    CatalogApi,
    OrderFlowApi,
};

use crate::{
    auth::{caller_from, AccessClaims, Role},
    config::ServerOptions,
    data_objects::{MenuQuery, OrderLookupParams, OwnershipProof, RetryPaymentRequest},
    errors::ServerError,
    helpers::get_remote_ip,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Menu  ----------------------------------------------------
route!(menu => Get "/menu" impl CatalogManagement);
/// Route handler for the menu endpoint
///
/// Anyone may browse the menu. Use `?category=pizza` (or any other category) to narrow the list down.
pub async fn menu<B: CatalogManagement>(
    query: web::Query<MenuQuery>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let category = query.into_inner().category;
    debug!("💻️ GET menu. Category: {category:?}");
    let items = api.menu(category).await?;
    Ok(HttpResponse::Ok().json(items))
}

route!(menu_item => Get "/menu/{id}" impl CatalogManagement);
pub async fn menu_item<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET menu item {id}");
    let item = api.menu_item(id).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(create_menu_item => Post "/menu" impl CatalogManagement where requires [Role::Staff]);
pub async fn create_menu_item<B: CatalogManagement>(
    body: web::Json<NewMenuItem>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let item = body.into_inner();
    debug!("💻️ POST new menu item {}", item.name);
    let item = api.create_menu_item(item).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(update_menu_item => Put "/menu/{id}" impl CatalogManagement where requires [Role::Staff]);
pub async fn update_menu_item<B: CatalogManagement>(
    path: web::Path<i64>,
    body: web::Json<MenuItemUpdate>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ PUT menu item {id}");
    let item = api.update_menu_item(id, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(delete_menu_item => Delete "/menu/{id}" impl CatalogManagement where requires [Role::Staff]);
pub async fn delete_menu_item<B: CatalogManagement>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE menu item {id}");
    api.delete_menu_item(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(place_order => Post "/orders" impl OrderManagement, PaymentProvider);
/// Route handler for placing an order
///
/// Anyone may place an order. On success, the response carries the payment provider's checkout URL
/// (`redirectUri`), where the buyer must be sent to pay, and the provider's reference for the payment (`orderId`).
///
/// If the payment could not be created, the order is still stored, in the `pending` state. The payment can be
/// started again with `POST /orders/{id}/payment`.
pub async fn place_order<B: OrderManagement, P: PaymentProvider>(
    req: HttpRequest,
    body: web::Json<PlaceOrderRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let order = body.into_inner();
    let customer_ip = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded).map(|ip| ip.to_string());
    debug!("💻️ POST new order for {}", order.customer_email);
    let redirect = api.place_order(order, customer_ip).await?;
    Ok(HttpResponse::Ok().json(redirect))
}

route!(list_orders => Get "/orders" impl OrderManagement, PaymentProvider);
/// Route handler for listing orders
///
/// Staff see every order, and may filter by `email`, `status`, `since` and `until`. Customers only ever see their own
/// orders.
pub async fn list_orders<B: OrderManagement, P: PaymentProvider>(
    claims: Option<AccessClaims>,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let caller = caller_from(claims);
    debug!("💻️ GET orders for {caller}");
    let orders = api.list_orders(&caller, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl OrderManagement, PaymentProvider);
/// Route handler for fetching a single order
///
/// Callers without an access token must prove ownership with `?email=`. Add `?check_payment=true` to get the payment
/// status of the order instead of its details.
pub async fn order_by_id<B: OrderManagement, P: PaymentProvider>(
    claims: Option<AccessClaims>,
    path: web::Path<String>,
    query: web::Query<OrderLookupParams>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let caller = caller_from(claims);
    let order_id = path.into_inner();
    let email = query.email.as_deref();
    if query.check_payment() {
        debug!("💻️ GET payment status of order {order_id} for {caller}");
        let status = api.check_payment_status(&caller, &order_id, email).await?;
        Ok(HttpResponse::Ok().json(status))
    } else {
        debug!("💻️ GET order {order_id} for {caller}");
        let order = api.fetch_order(&caller, &order_id, email).await?;
        Ok(HttpResponse::Ok().json(order))
    }
}

route!(update_order => Put "/orders/{id}" impl OrderManagement, PaymentProvider);
/// Route handler for changing an order. The proof email may be given as `email` in the body or as `?email=`.
pub async fn update_order<B: OrderManagement, P: PaymentProvider>(
    claims: Option<AccessClaims>,
    path: web::Path<String>,
    query: web::Query<OrderLookupParams>,
    body: web::Json<ModifyOrderRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let caller = caller_from(claims);
    let order_id = path.into_inner();
    debug!("💻️ PUT order {order_id} for {caller}");
    let order = api.update_order(&caller, &order_id, query.email.as_deref(), body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/orders/{id}" impl OrderManagement, PaymentProvider);
pub async fn delete_order<B: OrderManagement, P: PaymentProvider>(
    claims: Option<AccessClaims>,
    path: web::Path<String>,
    query: web::Query<OrderLookupParams>,
    body: Option<web::Json<OwnershipProof>>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError> {
    let caller = caller_from(claims);
    let order_id = path.into_inner();
    let email = body.and_then(|b| b.into_inner().email).or_else(|| query.into_inner().email);
    debug!("💻️ DELETE order {order_id} for {caller}");
    api.delete_order(&caller, &order_id, email.as_deref()).await?;
    Ok(HttpResponse::NoContent().finish())
}

route!(retry_payment => Post "/orders/{id}/payment" impl OrderManagement, PaymentProvider);
/// Route handler for restarting payment on an order whose payment could not be created when it was placed.
///
/// The proof email may be given in the body or as `?email=`.
pub async fn retry_payment<B: OrderManagement, P: PaymentProvider>(
    req: HttpRequest,
    claims: Option<AccessClaims>,
    path: web::Path<String>,
    query: web::Query<OrderLookupParams>,
    body: Option<web::Json<RetryPaymentRequest>>,
    api: web::Data<OrderFlowApi<B, P>>,
    options: web::Data<ServerOptions>,
) -> Result<HttpResponse, ServerError> {
    let caller = caller_from(claims);
    let order_id = path.into_inner();
    let body = body.map(|b| b.into_inner()).unwrap_or_default();
    let email = body.email.or_else(|| query.into_inner().email);
    let customer_ip = get_remote_ip(&req, options.use_x_forwarded_for, options.use_forwarded).map(|ip| ip.to_string());
    debug!("💻️ POST payment retry for order {order_id} by {caller}");
    let options = PaymentOptions::new(body.currency, customer_ip);
    let redirect = api.retry_payment(&caller, &order_id, email.as_deref(), options).await?;
    Ok(HttpResponse::Ok().json(redirect))
}

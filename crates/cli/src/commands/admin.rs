//! Admin dashboard commands.
//!
//! # Usage
//!
//! ```bash
//! # Sign in with an admin account
//! bk-cli admin login -e admin@example.com
//!
//! # Orders shipped in May, second page
//! bk-cli admin orders --status shipped --from 2024-05-01 --to 2024-05-31 --page 2
//!
//! # Pay the seller of one book in an order
//! bk-cli admin pay-seller 6650d1 --product 665f1c --method upi
//! ```

use book_kart_admin::list::{DEFAULT_PAGE_SIZE, choice};
use book_kart_admin::{
    AdminClient, AdminError, ListFilter, ListView, OrderEdit, OrderFilters, Page, PaymentFilters,
    PayoutForm,
};
use book_kart_core::models::{Order, SellerPayment};
use book_kart_core::types::{
    OrderId, OrderStatus, PaymentStatus, PayoutMethod, Price, ProductId, UserId,
};
use book_kart_storefront::Storefront;
use book_kart_storefront::api::LoginForm;
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use secrecy::SecretString;

use super::CommandError;

#[derive(Subcommand)]
pub enum AdminAction {
    /// Sign in; accounts without the admin role are refused
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(long, env = "BOOK_KART_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// List orders
    Orders {
        /// Order status, or "all"
        #[arg(long, default_value = "all")]
        status: String,
        /// Payment status, or "all"
        #[arg(long, default_value = "all")]
        payment_status: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Change an order's status, payment status or notes
    UpdateOrder {
        id: String,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        payment_status: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List seller payouts
    Payments {
        /// Only payouts to this seller
        #[arg(long)]
        seller: Option<String>,
        /// Payout status, or "all"
        #[arg(long, default_value = "all")]
        status: String,
        /// "UPI", "Bank Transfer", "Other" or "all"
        #[arg(long, default_value = "all")]
        method: String,
        #[command(flatten)]
        list: ListArgs,
    },
    /// Pay the seller of one product in an order
    PaySeller {
        order_id: String,
        #[arg(long)]
        product: String,
        /// "UPI", "Bank Transfer" or "Other"
        #[arg(long, default_value = "UPI")]
        method: String,
        /// Amount in rupees; defaults to the order total
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long, default_value = "")]
        notes: String,
    },
}

/// Date range, search and paging shared by the list commands.
#[derive(Args)]
pub struct ListArgs {
    /// First day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    limit: u32,
}

impl ListArgs {
    fn view<F: ListFilter>(&self, filters: F) -> ListView<F> {
        let mut view = ListView::new(filters);
        view.set_page_size(self.limit);
        view.set_page(self.page);
        view
    }
}

pub async fn run(shop: &Storefront, action: AdminAction) -> Result<(), CommandError> {
    if let AdminAction::Login { email, password } = action {
        let form = LoginForm {
            email,
            password: SecretString::from(password),
        };
        let user = shop.admin_login(&form).await?;
        print_signed_in(&user.name);
        return Ok(());
    }

    let user = shop.current_user().ok_or(CommandError::NotSignedIn)?;
    let result = match AdminClient::for_user(shop.client().clone(), &user) {
        Ok(admin) => dispatch(&admin, action).await,
        Err(e) => Err(e),
    };
    // Admin calls bypass the storefront effects, so notify here
    result.map_err(|e| {
        shop.toaster().error(e.user_message());
        CommandError::from(e)
    })
}

async fn dispatch(admin: &AdminClient, action: AdminAction) -> Result<(), AdminError> {
    match action {
        AdminAction::Login { .. } => {}
        AdminAction::Orders {
            status,
            payment_status,
            list,
        } => {
            let filters = OrderFilters {
                status: choice::<OrderStatus>("status", &status)?,
                payment_status: choice::<PaymentStatus>("payment-status", &payment_status)?,
                start_date: list.from,
                end_date: list.to,
                search: list.search.clone(),
            };
            print_orders(&admin.orders(&list.view(filters)).await?);
        }
        AdminAction::UpdateOrder {
            id,
            status,
            payment_status,
            notes,
        } => {
            let edit = OrderEdit {
                status: choice::<OrderStatus>("status", status.as_deref().unwrap_or(""))?,
                payment_status: choice::<PaymentStatus>(
                    "payment-status",
                    payment_status.as_deref().unwrap_or(""),
                )?,
                notes,
            };
            print_message(&admin.update_order(&OrderId::new(id), &edit).await?);
        }
        AdminAction::Payments {
            seller,
            status,
            method,
            list,
        } => {
            let filters = PaymentFilters {
                seller_id: seller.map(UserId::new),
                status: choice::<PaymentStatus>("status", &status)?,
                payment_method: choice::<PayoutMethod>("method", &method)?,
                start_date: list.from,
                end_date: list.to,
                search: list.search.clone(),
            };
            let page = admin.payments(&list.view(filters)).await?;
            print_payments(&page.payments);
        }
        AdminAction::PaySeller {
            order_id,
            product,
            method,
            amount,
            notes,
        } => {
            let order_id = OrderId::new(order_id);
            let mut form = match find_order(admin, &order_id).await? {
                Some(order) => PayoutForm::for_order(&order),
                None => PayoutForm {
                    product_id: None,
                    payment_method: None,
                    amount: Price::ZERO,
                    notes: String::new(),
                },
            };
            form.product_id = Some(ProductId::new(product));
            form.payment_method = choice::<PayoutMethod>("method", &method)?;
            form.notes = notes;
            if let Some(amount) = amount {
                form.amount = Price::new(amount);
            }
            print_message(&admin.process_seller_payment(&order_id, &form).await?);
        }
    }
    Ok(())
}

/// Look an order up through the order list's id search.
async fn find_order(admin: &AdminClient, id: &OrderId) -> Result<Option<Order>, AdminError> {
    let view = ListView::new(OrderFilters {
        search: id.to_string(),
        ..OrderFilters::default()
    });
    let page = admin.orders(&view).await?;
    Ok(page.items.into_iter().find(|o| &o.id == id))
}

#[allow(clippy::print_stdout)]
fn print_signed_in(name: &str) {
    println!("Signed in as {name} (admin)");
}

#[allow(clippy::print_stdout)]
fn print_message(message: &str) {
    println!("{message}");
}

#[allow(clippy::print_stdout)]
fn print_page_footer<T>(page: &Page<T>) {
    println!(
        "Page {} of {} ({} total)",
        page.page,
        page.total_pages.max(1),
        page.total
    );
}

#[allow(clippy::print_stdout)]
fn print_orders(page: &Page<Order>) {
    for order in &page.items {
        let placed = order
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
        println!(
            "{}  {placed}  {:<20}  {}  {}  payment {}",
            order.id,
            order.customer_name(),
            order.total_amount,
            order.status,
            order.payment_status
        );
    }
    print_page_footer(page);
}

#[allow(clippy::print_stdout)]
fn print_payments(page: &Page<SellerPayment>) {
    for payment in &page.items {
        let product = payment.product.as_ref().map_or("-", |p| p.title.as_str());
        println!(
            "{}  {:<20}  {product}  {}  {}  {}",
            payment.id,
            payment.seller_name(),
            payment.amount, payment.payment_method, payment.status
        );
    }
    print_page_footer(page);
}

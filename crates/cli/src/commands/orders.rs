//! Orders, checkout and address commands.

use book_kart_core::models::{AddressInput, GatewayPayment, Order};
use book_kart_core::types::{AddressId, OrderId};
use book_kart_storefront::Storefront;
use clap::Subcommand;

use super::CommandError;

#[derive(Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Add an address, or update one with --id
    Save {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        line1: String,
        #[arg(long)]
        line2: Option<String>,
        #[arg(long)]
        city: String,
        #[arg(long)]
        state: String,
        #[arg(long)]
        pincode: String,
    },
}

#[allow(clippy::print_stdout)]
fn print_order_line(order: &Order) {
    let placed = order
        .created_at
        .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string());
    println!(
        "{}  {placed}  {}  {}  payment {}",
        order.id, order.total_amount, order.status, order.payment_status
    );
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    print_order_line(order);
    for item in &order.items {
        println!(
            "  {} x{}  {}",
            item.product.title,
            item.quantity,
            item.product.final_price.times(item.quantity)
        );
    }
    if let Some(address) = &order.shipping_address {
        println!("  ship to: {}", address.one_line());
    }
}

pub async fn orders(shop: &Storefront, id: Option<String>) -> Result<(), CommandError> {
    match id {
        Some(id) => print_order(&shop.order(&OrderId::new(id)).await?),
        None => {
            for order in shop.orders().await? {
                print_order_line(&order);
            }
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn checkout(shop: &Storefront, address_id: &str) -> Result<(), CommandError> {
    let address = shop
        .addresses()
        .await?
        .into_iter()
        .find(|a| a.id.as_str() == address_id)
        .ok_or_else(|| CommandError::InvalidArgument {
            field: "address",
            message: format!("no saved address with id {address_id}"),
        })?;

    let checkout = shop.checkout(address).await?;
    print_order(&checkout.order);
    println!(
        "Gateway order {}: {} {} (paise)",
        checkout.payment.id, checkout.payment.amount, checkout.payment.currency
    );
    Ok(())
}

pub async fn confirm_payment(
    shop: &Storefront,
    order_id: String,
    razorpay_order_id: String,
    razorpay_payment_id: String,
    razorpay_signature: String,
) -> Result<(), CommandError> {
    let payment = GatewayPayment {
        razorpay_order_id,
        razorpay_payment_id,
        razorpay_signature,
    };
    let order = shop.confirm_payment(&OrderId::new(order_id), payment).await?;
    print_order(&order);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn address(shop: &Storefront, action: AddressAction) -> Result<(), CommandError> {
    match action {
        AddressAction::List => {
            for address in shop.addresses().await? {
                println!("{}  {}  {}", address.id, address.one_line(), address.phone_number);
            }
        }
        AddressAction::Save {
            id,
            phone,
            line1,
            line2,
            city,
            state,
            pincode,
        } => {
            let input = AddressInput {
                address_id: id.map(AddressId::new),
                phone_number: phone,
                address_line1: line1,
                address_line2: line2,
                city,
                state,
                pincode,
            };
            let address = shop.save_address(&input).await?;
            println!("{}  {}", address.id, address.one_line());
        }
    }
    Ok(())
}

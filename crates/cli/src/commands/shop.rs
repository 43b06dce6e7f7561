//! Listings, cart and wishlist commands.

use book_kart_core::models::{BankDetails, Book, NewBook, PayoutDetails};
use book_kart_core::types::{Price, ProductId, SellerPaymentMode, ShippingCharge};
use book_kart_storefront::Storefront;
use clap::{Subcommand, ValueEnum};
use rust_decimal::Decimal;

use super::CommandError;

#[derive(Subcommand)]
pub enum BookAction {
    /// List every book for sale
    List {
        /// Only titles, authors or subjects containing this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one listing
    Show { id: String },
    /// List the signed-in seller's own listings
    Mine,
    /// Put a book up for sale
    Sell(SellArgs),
    /// Take down one of your listings
    Delete { id: String },
}

#[derive(clap::Args)]
pub struct SellArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    category: String,
    #[arg(long)]
    condition: String,
    #[arg(long)]
    class_type: String,
    #[arg(long)]
    subject: String,
    #[arg(long)]
    author: String,
    #[arg(long, default_value = "")]
    edition: String,
    #[arg(long, default_value = "")]
    description: String,
    /// URL of an uploaded photo; repeat for more
    #[arg(long = "image")]
    images: Vec<String>,
    /// List price in rupees
    #[arg(long)]
    price: Decimal,
    /// Asking price in rupees
    #[arg(long)]
    final_price: Decimal,
    /// Shipping charge in rupees; omit for free shipping
    #[arg(long)]
    shipping: Option<Decimal>,
    #[arg(long, value_enum, default_value_t = PayoutMode::Upi)]
    payout: PayoutMode,
    #[arg(long, required_if_eq("payout", "upi"))]
    upi_id: Option<String>,
    #[arg(long, required_if_eq("payout", "bank"))]
    account_number: Option<String>,
    #[arg(long, required_if_eq("payout", "bank"))]
    ifsc_code: Option<String>,
    #[arg(long, required_if_eq("payout", "bank"))]
    bank_name: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PayoutMode {
    Upi,
    Bank,
}

impl SellArgs {
    fn into_new_book(self) -> Result<NewBook, CommandError> {
        if self.final_price > self.price {
            return Err(CommandError::InvalidArgument {
                field: "final-price",
                message: "must not exceed the list price".to_string(),
            });
        }

        let (payment_mode, payment_details) = match self.payout {
            PayoutMode::Upi => (
                SellerPaymentMode::Upi,
                PayoutDetails {
                    upi_id: self.upi_id,
                    bank_details: None,
                },
            ),
            PayoutMode::Bank => (
                SellerPaymentMode::BankAccount,
                PayoutDetails {
                    upi_id: None,
                    bank_details: Some(BankDetails {
                        account_number: self.account_number.unwrap_or_default(),
                        ifsc_code: self.ifsc_code.unwrap_or_default(),
                        bank_name: self.bank_name.unwrap_or_default(),
                    }),
                },
            ),
        };

        Ok(NewBook {
            title: self.title,
            images: self.images,
            category: self.category,
            condition: self.condition,
            class_type: self.class_type,
            subject: self.subject,
            author: self.author,
            edition: self.edition,
            description: self.description,
            price: Price::new(self.price),
            final_price: Price::new(self.final_price),
            shipping_charge: self
                .shipping
                .map_or(ShippingCharge::Free, |amount| ShippingCharge::Amount(Price::new(amount))),
            payment_mode,
            payment_details,
        })
    }
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a book
    Add {
        product_id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a book
    Remove { product_id: String },
}

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show saved books
    Show,
    /// Save a book for later
    Add { product_id: String },
    /// Forget a saved book
    Remove { product_id: String },
}

#[allow(clippy::print_stdout)]
fn print_book_line(book: &Book) {
    let discount = book.discount_percent();
    let discount = if discount > 0 {
        format!(" (-{discount}%)")
    } else {
        String::new()
    };
    println!(
        "{}  {} by {}  {}{discount}  shipping {}",
        book.id, book.title, book.author, book.final_price, book.shipping_charge
    );
}

#[allow(clippy::print_stdout)]
fn print_book(book: &Book) {
    println!("{}", book.title);
    println!("  id:        {}", book.id);
    println!("  author:    {}", book.author);
    println!("  subject:   {} ({})", book.subject, book.class_type);
    println!("  category:  {}", book.category);
    println!("  condition: {}", book.condition);
    if !book.edition.is_empty() {
        println!("  edition:   {}", book.edition);
    }
    println!(
        "  price:     {} (list {}, {}% off)",
        book.final_price,
        book.price,
        book.discount_percent()
    );
    println!("  shipping:  {}", book.shipping_charge);
    if let Some(seller) = &book.seller {
        println!("  seller:    {}", seller.name);
    }
    if !book.description.is_empty() {
        println!("\n{}", book.description);
    }
}

fn matches_search(book: &Book, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    [&book.title, &book.author, &book.subject]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[allow(clippy::print_stdout)]
pub async fn books(shop: &Storefront, action: BookAction) -> Result<(), CommandError> {
    match action {
        BookAction::List { search } => {
            let books = shop.books().await?;
            let mut shown = 0usize;
            for book in books
                .iter()
                .filter(|b| search.as_deref().is_none_or(|s| matches_search(b, s)))
            {
                print_book_line(book);
                shown += 1;
            }
            println!("{shown} book(s)");
        }
        BookAction::Show { id } => print_book(&shop.book(&ProductId::new(id)).await?),
        BookAction::Mine => {
            for book in shop.my_listings().await? {
                print_book_line(&book);
            }
        }
        BookAction::Sell(args) => {
            let book = shop.sell_book(&args.into_new_book()?).await?;
            print_book(&book);
        }
        BookAction::Delete { id } => shop.delete_listing(&ProductId::new(id)).await?,
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn cart(shop: &Storefront, action: CartAction) -> Result<(), CommandError> {
    match action {
        CartAction::Show => {
            shop.sync_cart().await?;
        }
        CartAction::Add {
            product_id,
            quantity,
        } => shop.add_to_cart(&ProductId::new(product_id), quantity).await?,
        CartAction::Remove { product_id } => {
            shop.remove_from_cart(&ProductId::new(product_id)).await?;
        }
    }

    let cart = shop.store().select(|s| s.cart.clone());
    if cart.is_empty() {
        println!("Your cart is empty");
        return Ok(());
    }
    for item in &cart.items {
        println!(
            "{}  {} x{}  {}",
            item.product.id,
            item.product.title,
            item.quantity,
            item.product.final_price.times(item.quantity)
        );
    }
    let summary = cart.summary();
    println!("Items:    {}", summary.item_count);
    println!("Subtotal: {}", summary.subtotal);
    println!("Shipping: {}", summary.shipping);
    println!("You save: {}", summary.savings());
    println!("Total:    {}", summary.total());
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn wishlist(shop: &Storefront, action: WishlistAction) -> Result<(), CommandError> {
    match action {
        WishlistAction::Show => shop.sync_wishlist().await?,
        WishlistAction::Add { product_id } => {
            shop.add_to_wishlist(&ProductId::new(product_id)).await?;
        }
        WishlistAction::Remove { product_id } => {
            shop.remove_from_wishlist(&ProductId::new(product_id)).await?;
        }
    }

    let items = shop.store().select(|s| s.wishlist.items.clone());
    let products: Vec<ProductId> = items.into_iter().flat_map(|w| w.products).collect();
    if products.is_empty() {
        println!("Your wishlist is empty");
    }
    for product in products {
        println!("{product}");
    }
    Ok(())
}

use crate::driver::Driver;
use crate::pages::{AddToCartOutcome, Header, ItemPage};
use crate::Result;
use tracing::info;

/// One product put in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedProduct {
    /// What was searched for.
    pub query: String,
    /// The result title that was opened.
    pub title: String,
    pub outcome: AddToCartOutcome,
}

/// Search, open the best matching result and check the product page loaded.
pub async fn search_and_open<'d, D: Driver>(
    header: Header<'d, D>,
    query: &str,
) -> Result<ItemPage<'d, D>> {
    let item = header
        .search(query)
        .await?
        .open_best_match(query)
        .await?;
    item.expect_loaded().await?;
    Ok(item)
}

pub async fn add_product_to_cart<'d, D: Driver>(
    header: Header<'d, D>,
    query: &str,
) -> Result<(ItemPage<'d, D>, AddedProduct)> {
    let item = search_and_open(header, query).await?;
    let outcome = item.add_to_cart().await?;
    let added = AddedProduct {
        query: query.to_string(),
        title: item.product().to_string(),
        outcome,
    };
    Ok((item, added))
}

/// Add each product in order. Stops at the first failure.
pub async fn add_multiple_products<'d, D: Driver>(
    mut header: Header<'d, D>,
    products: &[String],
) -> Result<(Header<'d, D>, Vec<AddedProduct>)> {
    let mut added = Vec::with_capacity(products.len());
    for (i, query) in products.iter().enumerate() {
        let (item, product) = add_product_to_cart(header, query).await?;
        info!("Product {}/{} in cart: {}", i + 1, products.len(), product.title);
        added.push(product);
        header = item.into_header();
    }
    Ok((header, added))
}

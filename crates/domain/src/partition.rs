//! Cart partitioning by seller.

use std::collections::HashMap;

use common::SellerRef;

use crate::order::CartItem;

/// The line items of one seller within a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct SellerGroup {
    pub seller: SellerRef,

    /// Shop name taken from the group's first item.
    pub shop_name: String,

    pub items: Vec<CartItem>,
}

/// Groups a cart by seller.
///
/// Groups appear in first-occurrence order and items keep their cart order
/// within a group. Every item lands in exactly one group; an empty cart
/// yields no groups.
pub fn partition_by_seller(cart: Vec<CartItem>) -> Vec<SellerGroup> {
    let mut index: HashMap<SellerRef, usize> = HashMap::new();
    let mut groups: Vec<SellerGroup> = Vec::new();

    for item in cart {
        match index.get(&item.seller) {
            Some(&i) => groups[i].items.push(item),
            None => {
                index.insert(item.seller.clone(), groups.len());
                groups.push(SellerGroup {
                    seller: item.seller.clone(),
                    shop_name: item.shop_name.clone(),
                    items: vec![item],
                });
            }
        }
    }

    groups
}

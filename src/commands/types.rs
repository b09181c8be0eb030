//! Listing of the supported method and grant types

use colored::Colorize;

use crate::settings::{oauth2_grant_types, MethodType};

/// Print method types and OAuth 2 grant types
pub fn list_types() {
    println!("{}", "Authorization methods".bold());
    for method in MethodType::ALL {
        println!("  {:<10} {}", method.as_str().green(), method.label());
    }

    println!();
    println!("{}", "OAuth 2 grant types".bold());
    for grant in oauth2_grant_types() {
        println!("  {:<20} {}", grant.grant_type.green(), grant.label);
    }
}

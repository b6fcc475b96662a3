//! Package pricing handlers.

use billdesk_core::{Console, PackageClass, PackagePrice};

use crate::cli::{GlobalOpts, PackageKind, PackagesArgs, PackagesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

impl From<PackageKind> for PackageClass {
    fn from(kind: PackageKind) -> Self {
        match kind {
            PackageKind::Internet => Self::Internet,
            PackageKind::Voice => Self::Voice,
            PackageKind::Sms => Self::Sms,
        }
    }
}

pub async fn handle(
    console: &Console,
    args: PackagesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PackagesCommand::Set { class, price } => {
            let req = PackagePrice {
                class: class.into(),
                price: util::amount("price", &price)?,
            };
            let message = format!("{} package price set to {:.2}", req.class, req.price);
            let ack = console.set_package_price(req).await?;
            output::print_success(&message, output::should_color(&global.color), global.quiet);
            super::print_ack(&ack, global)
        }
    }
}

mod bill;
mod category;
pub(crate) mod numeric;

pub(crate) use bill::{parse_bill_date, Bill, BILL_DATE_FORMAT};
pub(crate) use category::{Category, CategoryType};

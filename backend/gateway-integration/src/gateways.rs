pub mod globalpay;

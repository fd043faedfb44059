pub mod showroom;

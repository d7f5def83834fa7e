pub mod shelly;

pub mod socket_manager;

pub mod car_model;

pub mod recognize_thali;

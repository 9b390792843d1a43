mod blob;
mod capture;

mod resampler;
mod session;

use candle_core::Device;

pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(dev) => { tracing::info!("device: Metal (MPS)"); return dev; }
            Err(e) => tracing::warn!(error = %e, "Metal unavailable, falling back to CPU"),
        }
    }
    tracing::info!("device: CPU");
    Device::Cpu
}

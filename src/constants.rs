#[macro_export]
macro_rules! env_lazy {
    ($( $vis:vis $name:ident : $ty:ty = ($key:literal, $default:expr); )* ) => {
        $(
            $vis static $name: ::std::sync::LazyLock<$ty> = ::std::sync::LazyLock::new(|| {
                $crate::libs::config::load_env();
                $crate::libs::config::Config::get_var_t::<$ty>($key, $default)
            });
        )*
    };
}

env_lazy! {
    pub DEFAULT_GAS: u64 = ("CELO_DEFAULT_GAS", 50_000);
}

pub const DEFAULT_NETWORK: &str = "testnet";

pub const CELO_DECIMALS: u8 = 18;
